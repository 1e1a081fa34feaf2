//! UI Components

use leptos::prelude::*;

use crate::api::{AgentStep, Notice, TranscriptEntry};

/// Transcript entry bubble
#[component]
pub fn MessageBubble(entry: TranscriptEntry) -> impl IntoView {
    let class = if entry.is_error() {
        format!("message message-{} message-error", entry.role)
    } else {
        format!("message message-{}", entry.role)
    };

    view! {
        <div class=class>
            <span class="role">{entry.role.clone()}</span>
            <p class="content">{entry.content.clone()}</p>
        </div>
    }
}

/// Coloured inline notice
#[component]
pub fn NoticeView(notice: Notice) -> impl IntoView {
    let (level, text) = match notice {
        Notice::Info(t) => ("info", t),
        Notice::Warning(t) => ("warning", t),
        Notice::Success(t) => ("success", t),
        Notice::Error(t) => ("error", t),
    };

    view! { <div class=format!("notice notice-{level}")>{text}</div> }
}

/// Collapsed list of tool invocations
#[component]
pub fn StepList(steps: Vec<AgentStep>) -> impl IntoView {
    if steps.is_empty() {
        return ().into_any();
    }

    let count = steps.len();
    view! {
        <details class="steps">
            <summary>{format!("Agent steps ({count})")}</summary>
            <ol>
                {steps
                    .into_iter()
                    .map(|step| {
                        let class = if step.success { "step" } else { "step step-failed" };
                        view! {
                            <li class=class>
                                <strong>{step.tool}</strong>
                                <code>{step.input}</code>
                                <pre>{step.observation}</pre>
                            </li>
                        }
                    })
                    .collect_view()}
            </ol>
        </details>
    }
    .into_any()
}
