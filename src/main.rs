use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let out_dir = std::env::current_dir().context("cannot resolve output directory")?;
    stock_labels::run(&out_dir)
        .with_context(|| format!("label generation failed in {}", out_dir.display()))?;
    Ok(())
}
