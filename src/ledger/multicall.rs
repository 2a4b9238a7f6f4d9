// 13.2 ledger/multicall.rs: atomic batches.
// calls run in order against a working copy of the state; the copy replaces the
// committed state only when every call succeeded. events are buffered the same way.

use super::calls::{dispatch, Call, CallOutput};
use super::core::Ledger;
use super::results::MulticallError;
use crate::access::Controller;
use crate::errors::LedgerError;
use crate::handlers::OpContext;
use crate::types::AccountId;

impl Ledger {
    /// Runs `calls` for `caller` through `router`. all or nothing.
    pub fn multicall(
        &mut self,
        router: AccountId,
        caller: AccountId,
        calls: Vec<Call>,
    ) -> Result<Vec<CallOutput>, MulticallError> {
        let controller = Controller::acquire(&self.access, router).map_err(|e| MulticallError::new(0, e))?;
        let now = self.current_time;
        let mut working = self.state.clone();
        let mut buffered = Vec::new();
        let mut outputs = Vec::with_capacity(calls.len());

        for (index, call) in calls.into_iter().enumerate() {
            let name = call.name();
            let result = match call.required_role() {
                Some(role) => self.access.require(caller, role),
                None => Ok(()),
            }
            .and_then(|()| {
                let mut ctx = OpContext::new(&mut working, self.oracle.as_ref(), now, &mut buffered);
                dispatch(&mut ctx, caller, call)
            });

            match result {
                Ok(output) => outputs.push(output),
                Err(source) => {
                    tracing::warn!(
                        router = controller.router().0,
                        caller = caller.0,
                        index,
                        call = name,
                        error = %source,
                        "batch aborted"
                    );
                    return Err(MulticallError::new(index, source));
                }
            }
        }

        self.state = working;
        let emitted = buffered.len();
        self.events.append(now, buffered);
        tracing::debug!(
            router = controller.router().0,
            caller = caller.0,
            calls = outputs.len(),
            events = emitted,
            "batch committed"
        );
        Ok(outputs)
    }

    /// A batch of one.
    pub fn execute(&mut self, router: AccountId, caller: AccountId, call: Call) -> Result<CallOutput, LedgerError> {
        let mut outputs = self.multicall(router, caller, vec![call]).map_err(|e| e.source)?;
        Ok(outputs.pop().unwrap_or(CallOutput::Done))
    }

    /// Decodes a JSON array of calls and runs it as one batch.
    pub fn multicall_json(
        &mut self,
        router: AccountId,
        caller: AccountId,
        json: &str,
    ) -> Result<Vec<CallOutput>, MulticallError> {
        let calls: Vec<Call> = serde_json::from_str(json)
            .map_err(|e| MulticallError::new(0, LedgerError::MalformedBatch(e.to_string())))?;
        self.multicall(router, caller, calls)
    }
}
