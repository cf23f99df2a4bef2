//! Stage definition: who the stage is, what it may call, how its prompt reads

use crate::capabilities::{CapabilityKind, CapabilityRequest, is_reddit_url};
use crate::clients::ChatMessage;
use crate::pipeline::context::PipelineContext;
use crate::report::REPORT_SHAPE;

/// One step of the pipeline. `instruction` may contain `{query}`, replaced by
/// the effective query of the run.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub id: &'static str,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub instruction: &'static str,
    pub expected_output: &'static str,
    pub capabilities: &'static [CapabilityKind],
    /// Only the terminal stage sets this; its output must coerce into a Report
    pub structured: bool,
}

/// Text returned by one capability call
#[derive(Debug, Clone)]
pub struct Evidence {
    pub request: CapabilityRequest,
    pub text: String,
}

impl StageSpec {
    pub fn uses(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains(&kind)
    }

    /// Capability calls for this stage in a stable order, deduplicated and
    /// capped at `max_calls`
    pub fn plan_requests(&self, ctx: &PipelineContext, max_calls: usize) -> Vec<CapabilityRequest> {
        let inputs = ctx.inputs();
        let mut planned: Vec<CapabilityRequest> = Vec::new();
        let mut push = |kind: CapabilityKind, target: &str| {
            let request = CapabilityRequest::new(kind, target);
            if !planned.contains(&request) {
                planned.push(request);
            }
        };

        for kind in self.capabilities {
            match kind {
                CapabilityKind::Search => {
                    push(*kind, &inputs.effective_query);
                    for tag in &inputs.hashtags {
                        push(*kind, tag);
                    }
                }
                CapabilityKind::Scrape => {
                    for url in &inputs.urls {
                        push(*kind, url);
                    }
                }
                CapabilityKind::Social => {
                    let reddit: Vec<&String> =
                        inputs.urls.iter().filter(|u| is_reddit_url(u)).collect();
                    if !reddit.is_empty() {
                        for url in reddit {
                            push(*kind, url);
                        }
                    } else if inputs.hashtags.is_empty() && inputs.keywords.is_empty() {
                        push(*kind, &inputs.effective_query);
                    } else {
                        for term in inputs.hashtags.iter().chain(&inputs.keywords) {
                            push(*kind, term);
                        }
                    }
                }
            }
        }

        planned.truncate(max_calls);
        planned
    }

    pub fn instruction_for(&self, ctx: &PipelineContext) -> String {
        self.instruction
            .replace("{query}", &ctx.inputs().effective_query)
    }

    /// System persona plus one user message carrying everything the stage may read
    pub fn build_messages(&self, ctx: &PipelineContext, evidence: &[Evidence]) -> Vec<ChatMessage> {
        let system = format!(
            "You are the {}.\nGoal: {}\nBackground: {}",
            self.role, self.goal, self.backstory
        );

        let inputs = ctx.inputs();
        let mut user = String::new();
        user.push_str("## Task\n");
        user.push_str(self.instruction_for(ctx).trim());
        user.push_str("\n\n## Inputs\n");
        user.push_str(&format!("- Query: {}\n", inputs.query));
        if inputs.effective_query != inputs.query {
            user.push_str(&format!("- Analysis query: {}\n", inputs.effective_query));
        }
        push_list(&mut user, "URLs", &inputs.urls);
        push_list(&mut user, "Hashtags", &inputs.hashtags);
        push_list(&mut user, "Keywords", &inputs.keywords);

        if !ctx.outputs().is_empty() {
            user.push_str("\n## Findings from earlier stages\n");
            for output in ctx.outputs() {
                user.push_str(&format!(
                    "\n### {} ({})\n{}\n",
                    output.stage_id,
                    output.role,
                    output.text.trim()
                ));
            }
        }

        if !evidence.is_empty() {
            user.push_str("\n## Tool results\n");
            for item in evidence {
                user.push_str(&format!(
                    "\n### {} `{}`\n{}\n",
                    item.request.kind,
                    item.request.target,
                    item.text.trim()
                ));
            }
        }

        user.push_str("\n## Expected output\n");
        user.push_str(self.expected_output.trim());
        user.push('\n');

        if self.structured {
            user.push_str("\n## Output format\n");
            user.push_str(
                "Reply with a single JSON object and nothing else. NO markdown fences, NO commentary. \
                 Every list must be present even when empty. The object must have this shape:\n",
            );
            user.push_str(REPORT_SHAPE);
            user.push('\n');
        }

        vec![ChatMessage::system(system), ChatMessage::user(user)]
    }
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        out.push_str(&format!("- {}: {}\n", label, items.join(", ")));
    }
}
