// src/common/notify.rs

use std::sync::Arc;

// Severidad de las notificaciones que el frontend mostraba como toasts.
// Acá el colaborador es inyectable: en producción va a tracing, en los
// tests se puede capturar para verificar los avisos de degradación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Implementación por defecto: emite la notificación por tracing.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
    }
}

pub type SharedNotifier = Arc<dyn Notifier>;

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Notificador que acumula los mensajes recibidos, para los tests.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<(String, Severity)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, severity: Severity) {
            self.messages
                .lock()
                .unwrap()
                .push((message.to_string(), severity));
        }
    }
}
