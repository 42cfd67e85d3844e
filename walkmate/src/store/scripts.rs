use redis::Script;
use std::sync::LazyLock;

pub const DOCUMENT_PUT_SCRIPT_BODY: &str = include_str!("../../lua/document_put.lua");
pub const DOCUMENT_DELETE_SCRIPT_BODY: &str = include_str!("../../lua/document_delete.lua");

pub static DOCUMENT_PUT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOCUMENT_PUT_SCRIPT_BODY));
pub static DOCUMENT_DELETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOCUMENT_DELETE_SCRIPT_BODY));
