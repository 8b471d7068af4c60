pub mod azure_openai;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use crate::domain::models::VendorName;
use crate::domain::models::VendorRef;

pub struct VendorManager {}

impl VendorManager {
    pub fn get(name: VendorName) -> VendorRef {
        match name {
            VendorName::Ollama => return Arc::new(ollama::Ollama::default()),
            VendorName::Openai => return Arc::new(openai::OpenAI::default()),
            VendorName::AzureOpenai => return Arc::new(azure_openai::AzureOpenAI::default()),
        }
    }
}
