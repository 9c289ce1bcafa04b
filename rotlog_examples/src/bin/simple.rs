// example_simple — простой пример: конфигурация, логи в файл, завершение

use rotlog::{debug, error, fatalf, infof, warning, Config, Level, Logger};

const APP_NAME: &str = "example_simple";
const APP_VERSION: &str = "1.0.0";

fn main() {
    // 1. Инициализация: ошибки конфигурации видны только здесь
    let config = Config::new("logs", "simple").file_size(1).file_num(3).level(Level::Debug);
    let logger = match Logger::new(config) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[FATAL] Cannot initialize logger: {}", e);
            std::process::exit(1);
        }
    };

    infof!(logger, "Starting {} v{}", APP_NAME, APP_VERSION);

    if false {
        fatalf!(logger, "Simulated fatal during init: {}", "no config");
        logger.close();
        std::process::exit(1);
    }

    // 2. Основной код
    debug!(logger, "Application initialized successfully");
    debug!(logger, "Processing data block", 1);
    warning!(logger, "Non-critical issue detected");
    error!(logger, "An error occurred, but we continue");
    infof!(logger, "Processed {} blocks in {:.2}s", 2, 0.125);

    // 3. Финальная часть: всё, что в очереди, попадёт на диск
    infof!(logger, "{} finished successfully", APP_NAME);
    logger.close();
}
