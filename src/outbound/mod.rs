//! Adapters for the services the API talks to: mail, geocoding, file storage

pub mod blob;
pub mod geocoder;
pub mod mailer;

pub use blob::{BlobError, BlobWriter, FsBlobWriter, MemoryBlobWriter};
pub use geocoder::{FixedGeocoder, GeoLocation, GeocodeError, Geocoder, MapQuestGeocoder};
pub use mailer::{LogMailer, MailError, MailMessage, Mailer, RecordingMailer, SmtpMailer};
