use braseiro_core::{
    build_submission, Catalog, Conversation, DialogueEngine, Effect, StoreStatus, TurnContext,
};

const SIMULATED_CONVERSATION_ID: &str = "simulador@local";

/// Replays `messages` through the dialogue offline: the store is treated as
/// open, the clock is pinned to midday, and a finalized order is printed
/// instead of submitted.
pub fn run(messages: &[String]) -> String {
    let engine = match DialogueEngine::new(Catalog::new()) {
        Ok(engine) => engine,
        Err(error) => return format!("dialogue patterns failed to compile: {error}"),
    };

    let ctx = TurnContext { status: StoreStatus::open(), hour: 12 };
    let mut conversation = Conversation::new(SIMULATED_CONVERSATION_ID);
    let mut lines = Vec::new();

    for message in messages {
        lines.push(format!("> {message}"));

        let step = engine.handle(&mut conversation, message, &ctx);
        for reply in &step.replies {
            lines.push(reply.text.clone());
            if !reply.quick_replies.is_empty() {
                let options: Vec<String> = reply
                    .quick_replies
                    .iter()
                    .map(|quick_reply| format!("[{}]", quick_reply.label))
                    .collect();
                lines.push(options.join(" "));
            }
            lines.push(String::new());
        }

        match step.effect {
            None => {}
            Some(Effect::EndConversation) => {
                lines.push("-- conversation ended --".to_string());
                break;
            }
            Some(Effect::AgentRequested) => {
                lines.push("-- conversation flagged for a human agent --".to_string());
            }
            Some(Effect::SubmitOrder) => {
                let submission =
                    build_submission(SIMULATED_CONVERSATION_ID, &conversation.order);
                let payload = serde_json::to_string_pretty(&submission)
                    .unwrap_or_else(|error| format!("<serialization failed: {error}>"));
                lines.push("-- order would be submitted --".to_string());
                lines.push(payload);
                break;
            }
        }
    }

    lines.join("\n")
}
