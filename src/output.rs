// output formatting for one-shot answers - plain text or raw json

use crate::Reply;
use serde::Serialize;

pub struct Output;

#[derive(Serialize)]
struct AskJson<'a> {
    prompt: &'a str,
    reply: &'a str,
    flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<&'static str>,
    latency_ms: u64,
}

impl Output {
    // readable answer for humans
    pub fn pretty(prompt: &str, reply: &Reply) {
        println!("you: {prompt}\n");
        println!("{}", reply.text);
        println!("\n({}ms)", reply.latency.as_millis());
    }

    // raw json for scripts
    pub fn raw(prompt: &str, reply: &Reply) {
        let json = AskJson {
            prompt,
            reply: &reply.text,
            flagged: reply.trigger.is_some(),
            trigger: reply.trigger,
            latency_ms: reply.latency.as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&json).unwrap_or_default());
    }
}
