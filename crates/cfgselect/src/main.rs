fn main() -> anyhow::Result<()> {
    cfgselect::init();

    cfgselect::cli::run()
}
