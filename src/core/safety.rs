// post-filter for model replies
// best effort only: paraphrased approvals slip through. the real control is
// the supervisor, the disclaimer just points people back to them

pub const TRIGGERS: [&str; 4] = ["approve", "approved", "permission granted", "you can"];

pub const DISCLAIMER: &str =
    "\n\n⚠️ REMINDER: This is EXPLANATION ONLY. Consult your supervisor for approval.";

pub struct Safety {
    pub flagged: bool,
    pub trigger: Option<&'static str>,
}

impl Safety {
    pub fn check(text: &str) -> Self {
        let lower = text.to_lowercase();

        for trigger in TRIGGERS {
            if lower.contains(trigger) {
                return Self {
                    flagged: true,
                    trigger: Some(trigger),
                };
            }
        }

        Self {
            flagged: false,
            trigger: None,
        }
    }

    /// Returns `text` with the disclaimer appended when a trigger phrase shows up.
    pub fn filter(text: &str) -> String {
        if Self::check(text).flagged {
            format!("{text}{DISCLAIMER}")
        } else {
            text.to_string()
        }
    }
}
