use std::time::SystemTime;
use chrono::{DateTime, Utc};

pub type ServerTime = DateTime<Utc>;

pub fn get_server_time_now() -> ServerTime {
    ServerTime::from(SystemTime::now())
}
