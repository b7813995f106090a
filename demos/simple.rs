use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use svcwire::*;
use tracing_subscriber::EnvFilter;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

struct ConsoleLogger {
    prefix: Arc<String>,
}

impl Logger for ConsoleLogger {
    fn log(&self, content: &str) {
        println!("[{}] {}", self.prefix, content);
    }
}

struct DateLogger {
    logger: Arc<dyn Logger>,
}

impl DateLogger {
    fn new(logger: Arc<Arc<dyn Logger>>) -> Self {
        Self {
            logger: logger.as_ref().clone(),
        }
    }

    fn log_date(&self) {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        self.logger.log(&format!("{}s since epoch", now.as_secs()));
    }
}

fn main() -> Result<(), ResolveError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The logger is exposed as a trait object, so it uses a custom factory
    let mut logger = ServiceDescriptor::with_factory(
        "Logger",
        |params: &Parameters| -> Result<Value, ResolveError> {
            let prefix = params
                .get_as::<String>("prefix")
                .ok_or_else(|| ResolveError::construction("Logger", "missing prefix"))?;
            let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger { prefix });
            Ok(value(logger))
        },
    );
    logger.set_dependency("prefix", Arc::new(ValueDescriptor::new("demo".to_string())))?;

    let mut date_logger = ServiceDescriptor::new("DateLogger", DateLogger::new);
    date_logger.set_dependency("logger", Arc::new(ReferenceDescriptor::new("logger")))?;

    let mut container: HashMap<String, Arc<dyn Descriptor>> = HashMap::new();
    container.insert("logger".into(), Arc::new(logger));
    container.insert("date_logger".into(), Arc::new(date_logger));

    let service = ReferenceDescriptor::new("date_logger").resolve(&container)?;
    if let Some(date_logger) = service.downcast_ref::<DateLogger>() {
        date_logger.log_date();
    }

    Ok(())
}
