//! Assistant Page

use leptos::prelude::*;

use crate::api::{self, AskResponse, Notice, TranscriptEntry};
use crate::components::{MessageBubble, NoticeView, StepList};

// Shown before any request is made, so these mirror the server texts:
// `assistant_core::credential::MISSING_CREDENTIAL_NOTICE`,
// `assistant_core::interaction::EMPTY_QUESTION_NOTICE` and
// `assistant_tools::SAMPLE_QUESTION`.
const MISSING_KEY_NOTICE: &str = "Please add your Groq API key to continue";
const EMPTY_QUESTION_NOTICE: &str = "Please enter a question to continue.";

const SAMPLE_QUESTION: &str = "I have 5 bananas and 7 grapes. I eat 2 bananas and give away 3 grapes. Then I buy a dozen apples and 2 packs of blueberries. Each pack of blueberries contains 25 berries. How many total pieces of fruit do I have at the end?";

#[component]
pub fn AssistantPage() -> impl IntoView {
    let (api_key, set_api_key) = signal(String::new());
    let (session_id, set_session_id) = signal(None::<String>);
    let (transcript, set_transcript) = signal(Vec::<TranscriptEntry>::new());
    let (question, set_question) = signal(SAMPLE_QUESTION.to_string());
    let (loading, set_loading) = signal(false);
    let (response, set_response) = signal(None::<AskResponse>);
    let (notice, set_notice) = signal(None::<Notice>);

    // One session per page load
    leptos::task::spawn_local(async move {
        match api::create_session().await {
            Ok(session) => {
                set_transcript.set(session.transcript);
                set_session_id.set(Some(session.id));
            }
            Err(e) => set_notice.set(Some(e.notice())),
        }
    });

    let submit = move |_| {
        if loading.get() {
            return;
        }

        let text = question.get();
        if text.trim().is_empty() {
            set_notice.set(Some(Notice::Warning(EMPTY_QUESTION_NOTICE.into())));
            return;
        }
        let Some(id) = session_id.get() else {
            return;
        };

        set_notice.set(None);
        set_response.set(None);
        set_loading.set(true);

        // Shown until the server's copy arrives
        let shown_before = transcript.get_untracked();
        set_transcript.update(|entries| entries.push(TranscriptEntry::pending_user(text.clone())));

        let key = api_key.get();
        leptos::task::spawn_local(async move {
            match api::ask(&id, &text, &key).await {
                Ok(answer) => {
                    set_transcript.set(answer.transcript.clone());
                    set_response.set(Some(answer));
                }
                Err(e) => {
                    set_transcript.set(shown_before);
                    set_notice.set(Some(e.notice()));
                }
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="assistant">
            <aside class="sidebar">
                <div class="field">
                    <label>"Groq API Key"</label>
                    <input
                        type="password"
                        prop:value=move || api_key.get()
                        on:input=move |ev| set_api_key.set(event_target_value(&ev))
                    />
                </div>
            </aside>

            <section class="assistant-main">
                <h1>"Multi Purpose GenAI Assistant"</h1>

                <Show
                    when=move || !api_key.get().trim().is_empty()
                    fallback=|| view! { <NoticeView notice=Notice::Info(MISSING_KEY_NOTICE.into()) /> }
                >
                    <div class="messages">
                        <For
                            each=move || transcript.get().into_iter().enumerate()
                            key=|(i, entry)| (*i, entry.timestamp)
                            children=move |(_, entry)| view! { <MessageBubble entry=entry /> }
                        />
                    </div>

                    <div class="input-area">
                        <label>"Enter your question:"</label>
                        <textarea
                            prop:value=move || question.get()
                            on:input=move |ev| set_question.set(event_target_value(&ev))
                        />
                        <button on:click=submit disabled=move || loading.get() || session_id.get().is_none()>
                            "Find my answer"
                        </button>
                    </div>

                    <Show when=move || loading.get()>
                        <div class="spinner">"Generating response..."</div>
                    </Show>

                    {move || notice.get().map(|n| view! { <NoticeView notice=n /> })}

                    {move || {
                        response
                            .get()
                            .map(|r| {
                                view! {
                                    <div class=if r.failed { "response response-failed" } else { "response" }>
                                        <h3>"Response:"</h3>
                                        <NoticeView notice=r.notice />
                                        <StepList steps=r.steps />
                                    </div>
                                }
                            })
                    }}
                </Show>
            </section>
        </div>
    }
}
