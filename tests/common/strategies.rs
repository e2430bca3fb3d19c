use proptest::prelude::*;

/// A token with no spaces or double quotes
pub fn plain_token_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./=:-]{1,12}"
}

/// One to eight plain tokens
pub fn plain_tokens_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(plain_token_strategy(), 1..8)
}

/// Job lines for the scripted runner, mixing successes and failures
pub fn scripted_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => plain_token_strategy().prop_map(|arg| format!("ok {arg}")),
        1 => plain_token_strategy().prop_map(|arg| format!("fail {arg}")),
        1 => (0u64..5).prop_map(|ms| format!("sleep {ms}")),
    ]
}

pub fn scripted_batch_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(scripted_line_strategy(), 0..24)
}
