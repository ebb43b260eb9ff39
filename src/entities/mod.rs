pub mod prelude;

pub mod accessi;
pub mod dispositivi;
pub mod enti;
pub mod impiegati;
pub mod ordini;
pub mod reti;
pub mod servizi;
pub mod users;
