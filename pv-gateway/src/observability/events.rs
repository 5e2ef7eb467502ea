//! Canonical structured event names used across `pv-gateway`.

// Search filtering.
pub const SEARCH_BANNED_HOST: &str = "search_banned_host";
pub const SEARCH_BANNED_NAME: &str = "search_banned_name";
pub const SEARCH_BANNED_HOST_NAME: &str = "search_banned_host_name";
pub const SEARCH_POLICY_RESULT: &str = "search_policy_result";
pub const BAN_RECORDED: &str = "ban_recorded";
pub const BAN_CLEARED: &str = "ban_cleared";

// Channel cache and binding.
pub const CACHE_HIT: &str = "cache_hit";
pub const CACHE_MISS: &str = "cache_miss";
pub const CACHE_TEST: &str = "cache_test";
pub const CACHE_CONNECT: &str = "cache_connect";
pub const CACHE_SWEEP: &str = "cache_sweep";
pub const CACHE_EVICT: &str = "cache_evict";
pub const CACHE_DISCONNECT: &str = "cache_disconnect";
pub const CHANNEL_CREATE_REJECTED: &str = "channel_create_rejected";
pub const CHANNEL_BIND: &str = "channel_bind";
pub const CHANNEL_UNBIND: &str = "channel_unbind";
pub const UPSTREAM_DISCONNECT: &str = "upstream_disconnect";

// Operation forwarding.
pub const RPC_BEGIN: &str = "rpc_begin";
pub const RPC_DENIED: &str = "rpc_denied";
pub const RPC_COMPLETE: &str = "rpc_complete";
pub const RPC_FAILED: &str = "rpc_failed";
pub const INFO_BEGIN: &str = "info_begin";
pub const INFO_COMPLETE: &str = "info_complete";
pub const OP_INIT: &str = "op_init";
pub const OP_TYPED: &str = "op_typed";
pub const OP_INIT_FAILED: &str = "op_init_failed";
pub const OP_UNCACHED_DENIED: &str = "op_uncached_denied";
pub const OP_UNSUPPORTED: &str = "op_unsupported";
pub const GET_EXEC: &str = "get_exec";
pub const GET_EXEC_DONE: &str = "get_exec_done";
pub const PUT_EXEC: &str = "put_exec";
pub const PUT_DENIED: &str = "put_denied";
pub const PUT_EXEC_DONE: &str = "put_exec_done";
pub const PUT_AUDIT: &str = "put_audit";
pub const SHARED_GET_JOIN_CONNECTING: &str = "shared_get_join_connecting";
pub const SHARED_GET_JOIN_READY: &str = "shared_get_join_ready";
pub const SHARED_GET_NEW: &str = "shared_get_new";

// Monitor multiplexing.
pub const MONITOR_JOIN_CONNECTING: &str = "monitor_join_connecting";
pub const MONITOR_JOIN_RUNNING: &str = "monitor_join_running";
pub const MONITOR_NEW: &str = "monitor_new";
pub const MONITOR_TYPED: &str = "monitor_typed";
pub const MONITOR_SETUP_FAILED: &str = "monitor_setup_failed";
pub const MONITOR_EVENT: &str = "monitor_event";
pub const MONITOR_EVENT_FAILED: &str = "monitor_event_failed";
pub const MONITOR_FINISH: &str = "monitor_finish";
pub const MONITOR_UNCACHED_DENIED: &str = "monitor_uncached_denied";

// Runtime.
pub const SWEEP_LOOP_START: &str = "sweep_loop_start";
pub const SWEEP_LOOP_STOP: &str = "sweep_loop_stop";
