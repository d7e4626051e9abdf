fn main() -> anyhow::Result<()> {
    brrtrpc::cli::run_cli()
}
