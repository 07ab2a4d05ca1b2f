mod aaf;
mod cip;
mod header;
