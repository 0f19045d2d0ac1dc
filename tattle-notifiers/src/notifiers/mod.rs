pub mod governator;
pub mod redis_queue;
