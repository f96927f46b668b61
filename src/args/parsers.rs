use std::net::SocketAddr;

use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_failure_budget(s: &str) -> AppResult<u32> {
    let value: u32 = s.trim().parse().map_err(|err| {
        AppError::validation(ValidationError::InvalidNumber {
            value: s.to_owned(),
            source: err,
        })
    })?;
    if value == 0 {
        return Err(AppError::validation(ValidationError::FailureBudgetZero));
    }
    Ok(value)
}

pub(crate) fn parse_socket_addr(s: &str) -> AppResult<SocketAddr> {
    s.trim().parse::<SocketAddr>().map_err(|err| {
        AppError::validation(ValidationError::InvalidApiAddr {
            value: s.to_owned(),
            source: err,
        })
    })
}
