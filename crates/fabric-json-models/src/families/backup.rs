//! `BackupStorageDescription` family, dispatched on `StorageKind`.

use fabric_json_codec::{FieldType, SchemaBuilder};

use FieldType::Str;

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema
        .family("BackupStorageDescription", "StorageKind")
        .optional("FriendlyName", Str);
    schema
        .object("AzureBlobBackupStorageDescription")
        .extends("BackupStorageDescription")
        .tag("AzureBlobStore")
        .required("ConnectionString", Str)
        .required("ContainerName", Str);
    schema
        .object("FileShareBackupStorageDescription")
        .extends("BackupStorageDescription")
        .tag("FileShare")
        .required("Path", Str)
        .optional("PrimaryUserName", Str)
        .optional("PrimaryUserPassword", Str)
        .optional("SecondaryUserName", Str)
        .optional("SecondaryUserPassword", Str);
    schema
        .object("DsmsAzureBlobBackupStorageDescription")
        .extends("BackupStorageDescription")
        .tag("DsmsAzureBlobStore")
        .required("StorageCredentialsSourceLocation", Str)
        .required("ContainerName", Str);
    schema
        .object("ManagedIdentityAzureBlobBackupStorageDescription")
        .extends("BackupStorageDescription")
        .tag("ManagedIdentityAzureBlobStore")
        .required("ManagedIdentityType", Str)
        .required("BlobServiceUri", Str)
        .required("ContainerName", Str);
}
