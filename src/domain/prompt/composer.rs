use super::{ChatMessage, Command, Mode, Mood};

const BASELINE: &str = "You are a helpful AI assistant that follows these guidelines:
- Give clear and correct answers to simple questions directly
- Understand and remember context from the conversation
- Be honest - say \"I don't know\" instead of making things up
- Respond quickly and efficiently
- Use simple, easy-to-understand language when requested
- Provide accurate reasoning and correct conclusions
- Use your general knowledge for basic questions without unnecessary searching
- Explain mistakes clearly if something goes wrong
- Maintain a polite and neutral, respectful tone (not robotic)
- Avoid harmful or dangerous content
";

/// Phrase the model must use before a partial or speculative answer
pub const UNCERTAINTY_DISCLOSURE: &str = "I don't know yet, but here's what I can explain.";

/// Flags that shape the system prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptOptions {
    pub mode: Mode,
    pub mood: Mood,
    pub command: Option<Command>,
    pub simple_language: bool,
    pub error_free_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_prompt: String,
    /// `[system] + history + [user]`
    pub messages: Vec<ChatMessage>,
}

/// Builds the provider-agnostic instruction payload.
///
/// Pure string concatenation: identical options always yield identical prompts.
/// History is passed through untouched; trimming is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(
        &self,
        options: &PromptOptions,
        history: &[ChatMessage],
        message: &str,
    ) -> ComposedPrompt {
        let system_prompt = self.system_prompt(options);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt.clone()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(message));

        ComposedPrompt {
            system_prompt,
            messages,
        }
    }

    pub fn system_prompt(&self, options: &PromptOptions) -> String {
        let mut prompt = String::from(BASELINE);

        if options.simple_language {
            prompt.push_str("\nIMPORTANT: The user has requested simple language. Explain everything in easy-to-understand terms, using everyday words.");
        }

        prompt.push_str(mode_directive(options.mode));
        prompt.push_str(mood_directive(options.mood));

        if options.error_free_mode {
            prompt.push_str("\nIf you are not sure or do not know, say exactly: \"");
            prompt.push_str(UNCERTAINTY_DISCLOSURE);
            prompt.push_str("\" and then give your best partial explanation.");
        }

        if let Some(command) = options.command {
            prompt.push_str(command_directive(command));
        }

        prompt
    }
}

fn mode_directive(mode: Mode) -> &'static str {
    match mode {
        Mode::Fast => "\nIMPORTANT: The user is in fast mode. Prioritize short, direct answers over long explanations.",
        Mode::Detailed => "\nIMPORTANT: The user is in detailed mode. Provide more in-depth explanations and longer, more complete answers.",
        Mode::Coding => "\nIMPORTANT: The user is in coding mode. Prefer concise, correct code examples, focus on implementation, and return code blocks where helpful.",
    }
}

fn mood_directive(mood: Mood) -> &'static str {
    match mood {
        Mood::Friendly => "\nTone: Be warm, friendly, and encouraging, while staying clear and respectful.",
        Mood::Serious => "\nTone: Be serious and professional, without jokes.",
        Mood::Funny => "\nTone: Be light and a bit funny, but never offensive or distracting from the main answer.",
        Mood::Calm => "\nTone: Be calm, reassuring, and relaxed.",
    }
}

fn command_directive(command: Command) -> &'static str {
    match command {
        Command::Short => "\nCOMMAND: Answer in 1-2 short sentences only.",
        Command::Simple => "\nCOMMAND: Explain in very simple language, as if to a young student. Use at most 2-3 short sentences.",
        Command::Notes => "\nCOMMAND: Reply only as short bullet-point notes.",
        Command::Solve => "\nCOMMAND: Act as a math solver. Show the steps clearly, then the final answer.",
        Command::Translate => "\nCOMMAND: Translate between English and Hindi. Detect the direction automatically. For a single word, give meanings in both languages; for sentences, translate the full sentence clearly.",
        Command::Define => "\nCOMMAND: Give a short dictionary-style definition first, then one real-life example sentence.",
        Command::Eli5 => "\nCOMMAND: Explain like I am 5 years old, using one very simple sentence.",
        Command::Mental => "\nCOMMAND: For math, explain how to do the calculation mentally in a few clear steps.",
    }
}
