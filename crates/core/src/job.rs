use serde::{Deserialize, Serialize};

/// Job record context used to enrich prompts. Supplied by the surrounding
/// job-management system; this subsystem never loads or stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    pub job_number: String,
    pub client_name: String,
    pub description: String,
}

impl JobContext {
    pub fn new(
        job_number: impl Into<String>,
        client_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            job_number: job_number.into(),
            client_name: client_name.into(),
            description: description.into(),
        }
    }
}
