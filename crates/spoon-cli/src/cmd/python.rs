use crate::context::Ctx;
use spoon_core::classifier::{Category, Intent};
use spoon_core::types::PythonKind;

pub fn run(ctx: &Ctx, name: &str, kind: &str) -> anyhow::Result<()> {
    let kind: PythonKind = kind.parse()?;
    let intent = Intent::new(
        Category::PythonAi { kind },
        name,
        format!("python {kind} environment named {name}"),
    );
    super::go::execute(ctx, intent)
}
