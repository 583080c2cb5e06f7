// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Transport failures, split by what the user can do about them.
#[derive(Debug, Error)]
pub enum RestError {
    #[error("cannot reach {url} -- start the amforeas backend or fix server.base_url ({source})")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("server rejected the request: {message}")]
    Rejected { message: String },
    #[error("decode {what}: {detail}")]
    Decode { what: String, detail: String },
}

impl RestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Short prefix the UI puts in front of a failed action.
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "offline",
            Self::Status { .. } => "server error",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "bad response",
        }
    }

    /// Finds a transport error anywhere in an anyhow chain.
    pub fn find(error: &anyhow::Error) -> Option<&Self> {
        error.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::RestError;
    use anyhow::Context;

    #[test]
    fn find_walks_context_layers() {
        let error = Err::<(), _>(RestError::Status {
            status: 404,
            message: "no such car".to_owned(),
        })
        .context("update car 9")
        .context("sync car")
        .expect_err("error expected");

        let found = RestError::find(&error).expect("rest error in chain");
        assert!(found.is_not_found());
        assert_eq!(found.kind_label(), "server error");
        assert_eq!(found.to_string(), "server error (404): no such car");
    }

    #[test]
    fn plain_errors_have_no_transport_cause() {
        let error = anyhow::anyhow!("car model is required");
        assert!(RestError::find(&error).is_none());
    }
}
