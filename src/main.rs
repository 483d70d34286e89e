fn main() -> anyhow::Result<()> {
    cortex_splash_lib::run()
}
