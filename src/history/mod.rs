pub mod storage;

pub use storage::{append_record, get_log_path, load_records, LoggedPrediction, LOG_HEADER};
