pub use super::accessi::Entity as Accessi;
pub use super::dispositivi::Entity as Dispositivi;
pub use super::enti::Entity as Enti;
pub use super::impiegati::Entity as Impiegati;
pub use super::ordini::Entity as Ordini;
pub use super::reti::Entity as Reti;
pub use super::servizi::Entity as Servizi;
pub use super::users::Entity as Users;
