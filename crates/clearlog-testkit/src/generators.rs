//! Proptest generators for property-based testing.

use proptest::prelude::*;

use clearlog_core::AccessLog;

/// Generate a user id.
pub fn user_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate free text (tool names, justifications).
pub fn free_text() -> impl Strategy<Value = String> {
    "[ -~]{0,64}".prop_map(String::from)
}

/// Generate a reasonable timestamp in seconds.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800i64
}

/// Generate a list of data type names.
pub fn data_types() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,16}".prop_map(String::from), 0..=8)
}

/// Parameters for generating an access log.
#[derive(Debug, Clone)]
pub struct AccessLogParams {
    pub monitor: String,
    pub owner: String,
    pub tool: String,
    pub justification: String,
    pub timestamp: i64,
    pub access_kind: String,
    pub data_types: Vec<String>,
}

impl Arbitrary for AccessLogParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            user_id(),
            user_id(),
            free_text(),
            free_text(),
            timestamp(),
            free_text(),
            data_types(),
        )
            .prop_map(
                |(monitor, owner, tool, justification, timestamp, access_kind, data_types)| {
                    AccessLogParams {
                        monitor,
                        owner,
                        tool,
                        justification,
                        timestamp,
                        access_kind,
                        data_types,
                    }
                },
            )
            .boxed()
    }
}

/// Generate an access log from parameters.
pub fn access_log_from_params(params: &AccessLogParams) -> AccessLog {
    AccessLog::new(
        params.monitor.clone(),
        params.owner.clone(),
        params.tool.clone(),
        params.justification.clone(),
        params.timestamp,
        params.access_kind.clone(),
        params.data_types.clone(),
    )
}
