use super::ValidationCheck;

mod actions;
mod choices;
mod content;
mod flow;
mod references;
mod routes;
mod structure;
mod summary;

pub use actions::DataActionCheck;
pub use choices::ChoiceCheck;
pub use content::ContentCheck;
pub use flow::FlowCheck;
pub use references::ReferenceCheck;
pub use routes::RouteCheck;
pub use structure::StructureCheck;
pub use summary::SummaryCheck;

/// The built-in checks, in the order their findings appear in a report.
pub(super) fn default_checks() -> Vec<Box<dyn ValidationCheck>> {
    vec![
        Box::new(StructureCheck),
        Box::new(ReferenceCheck),
        Box::new(FlowCheck),
        Box::new(ChoiceCheck),
        Box::new(RouteCheck),
        Box::new(ContentCheck),
        Box::new(DataActionCheck),
        Box::new(SummaryCheck),
    ]
}
