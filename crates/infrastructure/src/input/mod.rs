pub mod domain_list;

pub use domain_list::{read_domain_list, read_domain_lists, DomainList};
