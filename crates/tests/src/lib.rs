
#[cfg(test)]
mod role_resolution_tests;




#[cfg(test)]
mod role_management_tests;

#[cfg(test)]
mod pg_store_tests;
