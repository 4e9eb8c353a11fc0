pub mod in_memory;
pub mod mercado_pago;
pub mod relay;
