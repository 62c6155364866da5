pub mod common;
mod deploy;
mod generate;
mod promote;
mod rollback;
mod site;
mod status;
