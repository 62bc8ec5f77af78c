//! Types for wallet error handling.

use std::error;
use std::fmt;

use verus_protocol::value::BalanceError;

/// A daemon reply that did not have the shape its method promises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyError {
    /// The daemon method whose reply could not be read.
    pub method: &'static str,
    /// What was wrong with the reply.
    pub reason: String,
}

impl ReplyError {
    pub(crate) fn new(method: &'static str, reason: impl Into<String>) -> Self {
        ReplyError {
            method,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed `{}` reply: {}", self.method, self.reason)
    }
}

impl error::Error for ReplyError {}

/// Errors that can occur while resolving a wallet's addresses and identities.
#[derive(Debug)]
pub enum Error<DaemonError> {
    /// The daemon rejected a call, or the call could not be completed.
    Daemon(DaemonError),

    /// The daemon answered, but the reply could not be interpreted.
    MalformedReply(ReplyError),

    /// Accumulating balances overflowed.
    Balance(BalanceError),

    /// Neither a public key nor a script could be found for the given address.
    NoPublicKey(String),
}

impl<DE: fmt::Display> fmt::Display for Error<DE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Daemon(e) => {
                write!(f, "The daemon produced the following error: {}", e)
            }
            Error::MalformedReply(e) => e.fmt(f),
            Error::Balance(e) => write!(f, "Balance accumulation failed: {}", e),
            Error::NoPublicKey(address) => write!(f, "No pubkey found for {}", address),
        }
    }
}

impl<DE> error::Error for Error<DE>
where
    DE: fmt::Debug + fmt::Display + error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self {
            Error::Daemon(e) => Some(e),
            Error::MalformedReply(e) => Some(e),
            Error::Balance(e) => Some(e),
            Error::NoPublicKey(_) => None,
        }
    }
}

impl<DE> From<ReplyError> for Error<DE> {
    fn from(e: ReplyError) -> Self {
        Error::MalformedReply(e)
    }
}

impl<DE> From<BalanceError> for Error<DE> {
    fn from(e: BalanceError) -> Self {
        Error::Balance(e)
    }
}
