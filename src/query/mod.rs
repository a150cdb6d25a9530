//! Per-resource instructions for the agent.

mod prompt;

pub use prompt::EXTRACTION_CONTRACT;

use crate::types::Resource;

/// Builds the text of each turn.
///
/// Turn 0 carries the full contract; later turns only ask for more and
/// restate the constraints, relying on the session for the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Instruction for turn 0.
    pub fn initial(&self, resource: &Resource) -> String {
        let mut query = format!(
            "Please extract a comprehensive set of highly-accurate observations about '{}'",
            resource.resource_name
        );
        if !resource.resource_type.trim().is_empty() {
            query.push_str(&format!(", a {}", resource.resource_type));
        }
        if let Some(synonyms) = &resource.synonyms {
            query.push_str(&format!(", also known as {synonyms}"));
        }
        if !resource.resource_id.trim().is_empty() {
            query.push_str(&format!(", resourceId: {}", resource.resource_id));
        }
        if let Some(rrid) = &resource.rrid {
            query.push_str(&format!(", RRID:{rrid}"));
        }
        query.push_str(".\n\n");
        query.push_str(EXTRACTION_CONTRACT);
        query
    }

    /// Instruction for every turn after the first.
    pub fn continuation(&self, resource: &Resource) -> String {
        format!(
            "Those observations are great. I would like more unique and highly-accurate \
             observations. I am not interested in observations that convey the same or nearly \
             the same information as what you already shared. Tell me some additional, not \
             previously mentioned observations about {}. Please be sure to follow all the \
             instructions in my first prompt, and most importantly please be sure that any \
             observations extracted are relevant to the named resource. False negatives are \
             acceptable for now, false positives (i.e. observations attributed to the wrong \
             resource or DOI) are not acceptable.",
            resource.resource_name
        )
    }
}
