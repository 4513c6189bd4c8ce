fn main() -> std::process::ExitCode {
    ideconfig_lib::run()
}
