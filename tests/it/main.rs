mod auth;
mod calendar;
mod helper;
mod opendata;
mod sync;
