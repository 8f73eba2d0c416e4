use crate::context::Ctx;
use spoon_core::classifier::{Category, Intent};
use spoon_core::target::extract_target;

/// Run `text` as a system command, translating it first when it reads like
/// a sentence and a chat key is configured.
pub fn run(ctx: &Ctx, text: &str) -> anyhow::Result<()> {
    let intent = Intent::new(Category::SystemCommand, extract_target(text), text);
    super::go::execute(ctx, intent)
}
