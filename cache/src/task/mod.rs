mod worker;

pub(crate) use worker::SerialWorker;
