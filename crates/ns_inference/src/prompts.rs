//! Instruction templates sent to the completion service.

pub const CONTEXT_PLACEHOLDER: &str = "{context_str}";
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

pub const CHUNK_SUMMARY_TEMPLATE: &str = "Read the following news content and summarize it concisely. \
Focus on key events, trends, numbers, and noteworthy developments.\n\n{context_str}";

pub const POST_TEMPLATE: &str = "You are a professional technical writer for a tech-savvy audience on LinkedIn.

Based on the following summaries of recent news articles about \"{topic}\", create a compelling LinkedIn-style post of about 200 words. Use the following format:

1. 🔥 Catchy Title (at the top, should grab attention immediately)
2. ✨ Short & engaging introduction (2–3 lines to hook the reader)
3. 📌 Key Highlights (use bullet points with brief, informative, and technical points)
4. 🧵 End with a call-to-action or closing remark relevant to professionals.
5. 📢 Add 5-7 relevant and trending hashtags (maximize reach, only technical/industry-specific tags)

Tone: Professional, insightful, and engaging. Avoid generic fluff. Assume your audience is engineers, founders, analysts, and industry insiders.

Here is the context to summarize:
{context_str}
";

/// Substitutes the chunk into the summary template.
pub fn chunk_prompt(chunk: &str) -> String {
    CHUNK_SUMMARY_TEMPLATE.replacen(CONTEXT_PLACEHOLDER, chunk, 1)
}

/// Substitutes the topic and the combined chunk summaries into the post template.
pub fn post_prompt(topic: &str, combined_summaries: &str) -> String {
    // Context goes last so braces inside article text are never re-interpreted.
    POST_TEMPLATE
        .replacen(TOPIC_PLACEHOLDER, topic, 1)
        .replacen(CONTEXT_PLACEHOLDER, combined_summaries, 1)
}
