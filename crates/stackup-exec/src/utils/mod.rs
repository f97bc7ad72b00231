mod log;
#[cfg(unix)]
pub(crate) use log::pre_exec_report;
