mod dictionary;
mod host_list;

pub use dictionary::Dictionary;
pub use host_list::HostList;
