pub mod dispositivo;
pub mod ente;
pub mod impiegato;
pub mod ordine;
pub mod reports;
pub mod rete;
pub mod servizio;
pub mod stats;
pub mod user;
