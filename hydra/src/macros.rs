/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use hydra::{Role, hydra_msg};
///
/// let message = hydra_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! hydra_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs, e.g. for explicit history.
///
/// ```rust
/// use hydra::{Role, hydra_messages};
///
/// let history = hydra_messages![
///     user => "What is Rust?",
///     assistant => "A systems programming language.",
/// ];
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[1].role, Role::Assistant);
/// ```
#[macro_export]
macro_rules! hydra_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::hydra_msg!($role => $content)),+]
    };
}

/// Creates a [`ChatRequest`](crate::ChatRequest), optionally pinning the
/// provider with a shorthand.
///
/// ```rust
/// use hydra::{ProviderId, hydra_request};
///
/// let request = hydra_request!(groq, "llama-3.1-8b-instant", "Hello");
/// assert_eq!(request.model.requested_provider(), Some(ProviderId::Groq));
///
/// let request = hydra_request!("gpt-4o-mini", "Hello");
/// assert_eq!(request.model.requested_provider(), Some(ProviderId::OpenAi));
/// ```
#[macro_export]
macro_rules! hydra_request {
    (openai, $model:expr, $message:expr $(,)?) => {
        $crate::hydra_request!(@provider $crate::ProviderId::OpenAi, $model, $message)
    };
    (anthropic, $model:expr, $message:expr $(,)?) => {
        $crate::hydra_request!(@provider $crate::ProviderId::Anthropic, $model, $message)
    };
    (claude, $model:expr, $message:expr $(,)?) => {
        $crate::hydra_request!(@provider $crate::ProviderId::Anthropic, $model, $message)
    };
    (groq, $model:expr, $message:expr $(,)?) => {
        $crate::hydra_request!(@provider $crate::ProviderId::Groq, $model, $message)
    };
    (gemini, $model:expr, $message:expr $(,)?) => {
        $crate::hydra_request!(@provider $crate::ProviderId::Gemini, $model, $message)
    };
    (@provider $provider:expr, $model:expr, $message:expr) => {
        $crate::ChatRequest::new($message)
            .with_model($model)
            .with_provider($provider)
    };
    ($model:expr, $message:expr $(,)?) => {
        $crate::ChatRequest::new($message).with_model($model)
    };
    ($provider:expr, $model:expr, $message:expr $(,)?) => {
        $crate::ChatRequest::new($message)
            .with_model($model)
            .with_provider($provider)
    };
}
