use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Version {
    #[allow(dead_code)]
    pub commit: String,
    pub short_commit: String,
    pub timestamp: DateTime<Utc>,
    pub channel: String,
    pub build_date: DateTime<Utc>,
    pub dirty: bool,
}

impl Version {
    pub fn current() -> Self {
        let timestamp =
            DateTime::from_timestamp(env!("GIT_TIMESTAMP").parse::<i64>().unwrap_or(0), 0)
                .unwrap_or_else(Utc::now);

        Self {
            commit: env!("GIT_COMMIT").to_string(),
            short_commit: env!("GIT_COMMIT_SHORT").to_string(),
            timestamp,
            channel: env!("RELEASE_CHANNEL").to_string(),
            build_date: env!("BUILD_DATE").parse().unwrap_or_else(|_| Utc::now()),
            dirty: env!("GIT_DIRTY") == "true",
        }
    }

    pub fn version_string(&self) -> String {
        // format: hash (channel, date)
        let dirty_marker = if self.dirty { " *" } else { "" };
        format!(
            "{}{} ({}, {})",
            self.short_commit,
            dirty_marker,
            self.channel,
            self.timestamp.format("%Y-%m-%d")
        )
    }

    pub fn full_version_string(&self) -> String {
        format!(
            "{} (built {})",
            self.version_string(),
            self.build_date.format("%Y-%m-%d %H:%M UTC")
        )
    }
}
