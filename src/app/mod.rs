mod orchestrator;


pub use orchestrator::Orchestrator;
