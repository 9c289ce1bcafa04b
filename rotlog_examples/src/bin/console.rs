// example_console — режим отладки и глобальный логгер
//
// В режиме отладки файл не создаётся: каждая запись сразу печатается в stdout.
// Глобальные макросы до `rotlog::init` ведут себя так же.

use rotlog::{debug, gdebug, ginfof, gerror, infof, Config, Logger};

fn main() {
    // До инициализации глобального логгера — консоль
    gdebug!("global logger is not initialized yet");

    let console = match Logger::new(Config::default().debug(true)) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[FATAL] {}", e);
            std::process::exit(1);
        }
    };
    debug!(console, "debug mode ignores the level filter:", console.is_debug());
    infof!(console, "{:>8}|{:<8}|{:^8}", "right", "left", "mid");
    infof!(console, "hex {:x} padded {:08.3}", 255, 3.14159);

    // Ошибка инициализации возвращается вызывающему
    if let Err(e) = rotlog::init(Config::new("logs", "").file_size(1)) {
        gerror!("init rejected:", e.to_string());
    }

    if let Err(e) = rotlog::init(Config::new("logs", "console")) {
        eprintln!("[FATAL] {}", e);
        std::process::exit(1);
    }
    ginfof!("global logger writes to {}", "logs/console.log");
    rotlog::close();
}
