//! Whitelisted methods and functions.

pub mod functions;
pub mod methods;

use crate::types::{FunctionDefinition, MethodDefinition};

pub fn find_method(name: &str) -> Option<&'static MethodDefinition> {
    methods::METHODS.iter().find(|m| m.name == name)
}

pub fn find_function(name: &str) -> Option<&'static FunctionDefinition> {
    functions::FUNCTIONS
        .iter()
        .find(|f| f.name == name || f.aliases.iter().any(|alias| *alias == name))
}
