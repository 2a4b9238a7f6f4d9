// 13.3: batch failure. index is the failing call's position; router rejection reports 0.

use crate::errors::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Call {index} failed: {source}")]
pub struct MulticallError {
    pub index: usize,
    pub source: LedgerError,
}

impl MulticallError {
    pub fn new(index: usize, source: LedgerError) -> Self {
        Self { index, source }
    }
}
